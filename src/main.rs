fn main() {
    if let Err(err) = ddg_node_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
