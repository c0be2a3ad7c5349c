#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        super_call in inheritance is OK
        "Fry until golden."
        "Pipe full of custard and coat with chocolate."
    }
}
