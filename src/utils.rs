///Returns last OS error from current function, when condition doesn't hold.
#[allow(unused_macros)]
macro_rules! os_try {
    ($cond:expr) => ({
        if !($cond) {
            return Err(std::io::Error::last_os_error());
        }
    })
}
