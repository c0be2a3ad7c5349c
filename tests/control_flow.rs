#[macro_use]
mod common;

#[cfg(test)]
mod control_flow {
    tests! {
        if_else in control_flow is OK
        "yes"
        "no"
    }

    tests! {
        while_loop in control_flow is OK
        "0"
        "1"
        "2"
    }

    tests! {
        for_loop in control_flow is OK
        "0"
        "1"
        "2"
    }
}
