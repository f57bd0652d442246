use super::traits::{Int, Precision};

macro_rules! fixed_int {
    ($int:ident, $precision:ident) => {
        impl Int for $int {
            fn precision() -> Precision {
                Precision::$precision
            }
        }
    };
}

fixed_int!(i32, Int32);
fixed_int!(i64, Int64);
