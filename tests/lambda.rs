#[macro_use]
mod common;

#[cfg(test)]
mod lambda {
    tests! {
        basic in lambda is OK
        "5"
        "25"
    }
}
