use std::process;

fn main() {
    if let Err(err) = yoloprep::run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}
