#[macro_use]
mod common;

#[cfg(test)]
mod function {
    tests! {
        fibonacci in function is OK
        "0"
        "1"
        "1"
        "2"
        "3"
        "5"
        "8"
        "13"
    }

    tests! {
        closure in function is OK
        "1"
        "2"
        "3"
    }

    tests! {
        arity in function is ERR
        "Expected 2 arguments but got 1."
        "[line 5]"
    }
}
