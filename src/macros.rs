//===========================================================================//

// Returns early with an `InvalidData` I/O error, formatted like `format!`.
macro_rules! invalid_data {
    ($($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidData,
            format!($($arg)+),
        ))
    };
}

// Returns early with an `InvalidInput` I/O error, formatted like `format!`.
macro_rules! invalid_input {
    ($($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidInput,
            format!($($arg)+),
        ))
    };
}

//===========================================================================//
