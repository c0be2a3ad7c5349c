#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        basic in class is OK
        "a plain bagel"
        "Bagel instance"
    }

    tests! {
        bare_return_init in class is OK
        "Widget instance"
        "gadget"
    }
}
