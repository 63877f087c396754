pub mod dot;

use std::io::Read;
use std::path::Path;

pub use dot::parse_dot;

/// Read the whole input document. A path of `-` reads standard input.
pub fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    std::fs::read_to_string(path)
}
