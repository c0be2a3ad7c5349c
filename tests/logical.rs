#[macro_use]
mod common;

#[cfg(test)]
mod logical {
    tests! {
        short_circuit in logical is OK
        "and"
        "true"
        "or"
        "true"
    }
}
