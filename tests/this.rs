#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        closure in this is OK
        "Thing instance"
    }
}
