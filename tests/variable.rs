#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        global in variable is OK
        "before"
        "after"
    }

    tests! {
        local in variable is OK
        "inner"
        "outer"
    }

    tests! {
        uninitialized in variable is ERR
        "Uninitialized variable 'a'."
        "[line 3]"
    }

    tests! {
        undefined in variable is ERR
        "Undefined variable 'unknown'."
        "[line 1]"
    }

    tests! {
        redeclare in variable is ERR
        "[line 3] Error at 'a': Already a variable with this name in this scope."
    }
}
