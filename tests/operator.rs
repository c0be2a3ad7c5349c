#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        arithmetic in operator is OK
        "3"
        "foobar"
        "count: 3"
        "5"
        "14"
    }

    tests! {
        divide_by_zero in operator is ERR
        "Cannot divide by zero."
        "[line 1]"
    }

    tests! {
        type_error in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        plus_type_error in operator is ERR
        "Operands must be two numbers or either operands must be a string."
        "[line 1]"
    }
}
