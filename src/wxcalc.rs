//! Weather calculations.

use crate::errors::WuFillErr;

fn c_to_f(c: f64) -> f64 {
    c * 1.8 + 32.0
}

fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Calculate the dew point in Fahrenheit from a temperature in Fahrenheit and a relative
/// humidity percentage.
///
/// Uses the Magnus-Tetens approximation. The formula takes the log of `humidity / 100`, so
/// the humidity must be positive or the result would not be a finite number.
pub fn dew_point(temperature_f: f64, humidity: i32) -> Result<f64, WuFillErr> {
    // Magnus-Tetens constants, fixed by the approximation.
    const A: f64 = 17.27;
    const B: f64 = 237.7;

    if humidity <= 0 {
        return Err(WuFillErr::InvalidHumidity(humidity));
    }

    let tc = f_to_c(temperature_f);
    let x = (A * tc) / (B + tc) + (f64::from(humidity) / 100.0).ln();
    let dew_point_c = (B * x) / (A - x);

    Ok(c_to_f(dew_point_c))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
