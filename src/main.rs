fn main() {
    if let Err(err) = feedback_lens::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
