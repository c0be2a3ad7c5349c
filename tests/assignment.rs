#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    tests! {
        basic in assignment is OK
        "before"
        "after"
    }

    tests! {
        invalid_target in assignment is ERR
        "[line 3] Error at '=': Invalid assignment target."
    }
}
