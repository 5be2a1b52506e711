use crate::{Constants, Error, Input, Real, DEFAULT_PRECISION};
use num_bigint::BigInt;
use pyo3::basic::CompareOp;
use pyo3::create_exception;
use pyo3::exceptions::{
    PyException, PyNotImplementedError, PyRuntimeError, PyTypeError,
    PyValueError,
};
use pyo3::prelude::*;

create_exception!(
    _bigreal,
    InvalidOperationError,
    PyException,
    "Raised for operations that are undefined, such as division by zero."
);

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        let msg = err.to_string();
        match err {
            Error::InvalidOperation(_) => InvalidOperationError::new_err(msg),
            Error::Unsupported(_) => PyNotImplementedError::new_err(msg),
            Error::Convergence { .. } => PyRuntimeError::new_err(msg),
            Error::InvalidPrecision | Error::NonFinite(_) | Error::Parse(_) => {
                PyValueError::new_err(msg)
            }
        }
    }
}

/// Convert a Python int, float or str to the input of a number.
fn extract_input(value: &Bound<'_, PyAny>) -> PyResult<Input> {
    // Try int first, because ints also convert to float.
    if let Ok(val) = value.extract::<BigInt>() {
        return Ok(Input::Integer(val));
    }
    if let Ok(val) = value.extract::<f64>() {
        return Ok(Input::Float(val));
    }
    if let Ok(val) = value.extract::<String>() {
        return Ok(Input::Decimal(val));
    }
    Err(PyTypeError::new_err(format!(
        "cannot construct a Real from {}",
        value.get_type().name()?
    )))
}

/// Convert a Real, or a value that can construct one, to a number.
fn to_real(value: &Bound<'_, PyAny>) -> PyResult<Real> {
    if let Ok(real) = value.downcast::<PyReal>() {
        return Ok(real.borrow().inner.clone());
    }
    Ok(Real::from_input(extract_input(value)?, DEFAULT_PRECISION)?)
}

/// A class representing arbitrary precision binary real numbers.
///
/// The number is coefficient * 2^exponent, where the coefficient has exactly
/// `precision` bits. Results are truncated to the smaller precision of the
/// operands.
#[pyclass(name = "Real")]
#[derive(Clone)]
struct PyReal {
    inner: Real,
}

impl From<Real> for PyReal {
    fn from(inner: Real) -> Self {
        PyReal { inner }
    }
}

#[pymethods]
impl PyReal {
    /// Create a new number.
    ///
    /// Args:
    ///     value: An int, float, str or Real. With `exponent`, the integer
    ///         coefficient of the number.
    ///     exponent: The power of two that scales the coefficient.
    ///     precision: The number of bits in the coefficient.
    #[new]
    #[pyo3(signature = (value, exponent=None, precision=None))]
    fn new(
        value: &Bound<'_, PyAny>,
        exponent: Option<BigInt>,
        precision: Option<usize>,
    ) -> PyResult<Self> {
        if let Ok(real) = value.downcast::<PyReal>() {
            let real = real.borrow();
            let precision = precision.unwrap_or(real.inner.precision());
            return Ok(real.inner.with_precision(precision)?.into());
        }

        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        let inner = match exponent {
            Some(exponent) => {
                let coefficient: BigInt = value.extract()?;
                Real::new(coefficient, exponent, precision)?
            }
            None => Real::from_input(extract_input(value)?, precision)?,
        };
        Ok(inner.into())
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
    fn __repr__(&self) -> String {
        format!("Real('{}', precision={})", self.inner, self.inner.precision())
    }
    fn __float__(&self) -> f64 {
        self.inner.to_f64()
    }
    fn __int__(&self) -> PyResult<BigInt> {
        Ok(self.inner.to_integer()?)
    }

    /// Returns the coefficient of the number.
    #[getter]
    fn coefficient(&self) -> BigInt {
        self.inner.coefficient().clone()
    }
    /// Returns the exponent of the number.
    #[getter]
    fn exponent(&self) -> BigInt {
        self.inner.exponent().clone()
    }
    /// Returns the precision of the number in bits.
    #[getter]
    fn precision(&self) -> usize {
        self.inner.precision()
    }

    /// Change the precision of the number. Lowering the precision discards
    /// bits.
    fn set_precision(&mut self, precision: usize) -> PyResult<()> {
        Ok(self.inner.set_precision(precision)?)
    }
    /// Returns the next number with the same precision.
    fn next(&self) -> PyReal {
        self.inner.next().into()
    }
    /// Returns the previous number with the same precision.
    fn prev(&self) -> PyReal {
        self.inner.prev().into()
    }

    fn __add__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(self.inner.add(&to_real(other)?).into())
    }
    fn __radd__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(to_real(other)?.add(&self.inner).into())
    }
    fn __sub__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(self.inner.sub(&to_real(other)?).into())
    }
    fn __rsub__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(to_real(other)?.sub(&self.inner).into())
    }
    fn __mul__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(self.inner.mul(&to_real(other)?).into())
    }
    fn __rmul__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(to_real(other)?.mul(&self.inner).into())
    }
    fn __truediv__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(self.inner.div(&to_real(other)?)?.into())
    }
    fn __rtruediv__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(to_real(other)?.div(&self.inner)?.into())
    }
    fn __floordiv__(&self, other: &Bound<'_, PyAny>) -> PyResult<PyReal> {
        Ok(self.inner.div_floor(&to_real(other)?)?.into())
    }
    fn __pow__(
        &self,
        other: &Bound<'_, PyAny>,
        _modulo: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyReal> {
        Ok(self.inner.pow(&to_real(other)?)?.into())
    }

    fn __neg__(&self) -> PyReal {
        self.inner.neg().into()
    }
    fn __pos__(&self) -> PyReal {
        self.clone()
    }
    fn __abs__(&self) -> PyReal {
        self.inner.abs().into()
    }
    #[pyo3(signature = (_ndigits=None))]
    fn __round__(&self, _ndigits: Option<i64>) -> PyReal {
        self.inner.round().into()
    }
    fn __floor__(&self) -> PyReal {
        self.inner.floor().into()
    }
    fn __ceil__(&self) -> PyReal {
        self.inner.ceil().into()
    }

    /// Compare two numbers. Numbers that differ by a few units in the last
    /// place are equal.
    fn __richcmp__(
        &self,
        other: &Bound<'_, PyAny>,
        op: CompareOp,
    ) -> PyResult<bool> {
        let other = other.downcast::<PyReal>().map_err(|_| {
            PyErr::from(Error::Unsupported(
                "comparison of a Real with a different type".to_string(),
            ))
        })?;
        let ordering = self.inner.compare(&other.borrow().inner);
        Ok(op.matches(ordering))
    }

    /// Returns the square root of the number.
    fn sqrt(&self) -> PyResult<PyReal> {
        Ok(self.inner.sqrt()?.into())
    }
    /// Returns the n-th root of the number.
    fn root(&self, n: u64) -> PyResult<PyReal> {
        Ok(self.inner.root(n)?.into())
    }
    /// Returns the natural logarithm of the number.
    fn log(&self) -> PyResult<PyReal> {
        Ok(self.inner.log()?.into())
    }
    /// Returns e raised to the power of the number.
    fn exp(&self) -> PyResult<PyReal> {
        Ok(self.inner.exp()?.into())
    }
    fn sin(&self) -> PyResult<PyReal> {
        Ok(self.inner.sin()?.into())
    }
    fn cos(&self) -> PyResult<PyReal> {
        Ok(self.inner.cos()?.into())
    }
    fn tan(&self) -> PyResult<PyReal> {
        Ok(self.inner.tan()?.into())
    }
} // impl PyReal

/// Returns the mathematical constant pi with the given precision.
#[pyfunction]
fn pi(precision: usize) -> PyResult<PyReal> {
    Ok(Constants::global().pi(precision)?.into())
}

/// Returns the mathematical constant e (Euler's number) with the given
/// precision.
#[pyfunction]
fn e(precision: usize) -> PyResult<PyReal> {
    Ok(Constants::global().e(precision)?.into())
}

/// Returns the natural logarithm of 2 (ln(2)) with the given precision.
#[pyfunction]
fn ln2(precision: usize) -> PyResult<PyReal> {
    Ok(Constants::global().ln2(precision)?.into())
}

/// Returns the natural logarithm of 10 (ln(10)) with the given precision.
#[pyfunction]
fn ln10(precision: usize) -> PyResult<PyReal> {
    Ok(Constants::global().ln10(precision)?.into())
}

#[pymodule]
fn _bigreal(py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyReal>()?;
    m.add("InvalidOperationError", py.get_type::<InvalidOperationError>())?;

    // Add the functions to the module
    m.add_function(wrap_pyfunction!(pi, m)?)?;
    m.add_function(wrap_pyfunction!(e, m)?)?;
    m.add_function(wrap_pyfunction!(ln2, m)?)?;
    m.add_function(wrap_pyfunction!(ln10, m)?)?;
    Ok(())
}
