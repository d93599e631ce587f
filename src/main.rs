use heartfield::FieldConfig;

fn main() {
    let cfg = match std::env::args().nth(1).as_deref() {
        Some("classic") => FieldConfig::classic(),
        _ => FieldConfig::ember(),
    };

    if let Err(e) = heartfield::run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
