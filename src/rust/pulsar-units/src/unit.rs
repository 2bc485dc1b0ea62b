// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub(crate) fn round_to_significant_digits(x: f64, n: u32) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        let order = x.abs().log10().floor();
        let scale = 10f64.powf((n as f64) - 1.0 - order);
        (x * scale).round() / scale
    }
}

/// Declare a physical quantity tagged with a zero-sized unit type.
///
/// The generated type compares `0.0` and `-0.0` as equal and has a `Display`
/// that appends the unit symbol.
#[macro_export]
macro_rules! quantity {
    ($ident:ident) => {
        #[derive(std::clone::Clone, std::marker::Copy, core::fmt::Debug)]
        pub struct $ident<U, T = f64> {
            pub(crate) value: T,
            pub(crate) unit: U,
        }

        impl<U, T> $ident<U, T> {
            pub fn value(self) -> T {
                self.value
            }
        }

        impl<U, T: num_traits::Zero + std::cmp::PartialEq> PartialEq for $ident<U, T> {
            fn eq(&self, other: &Self) -> bool {
                (self.value.is_zero() && other.value.is_zero()) || self.value == other.value
            }
        }

        impl<U, T> std::fmt::Display for $ident<U, T>
        where
            T: std::fmt::Display + num_traits::AsPrimitive<f64> + num_traits::Float,
            U: std::fmt::Display,
        {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if f.alternate() {
                    std::fmt::Display::fmt(&self.value, f)?;
                } else {
                    // Debug formatting switches to scientific notation on its own.
                    // Trim the digits that only carry rounding noise.
                    let significand_digits = (-T::epsilon().log10() - T::one()).as_() as u32;
                    let value = $crate::unit::round_to_significant_digits(
                        self.value.as_(),
                        significand_digits,
                    );
                    std::fmt::Debug::fmt(&value, f)?;
                }
                write!(f, " {}", self.unit)
            }
        }
    };
}
