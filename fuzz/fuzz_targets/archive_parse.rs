use compression_analyzer::{parse, serialize};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            // Anything that parses must serialize back to the same bytes.
            if let Ok(entries) = parse(data) {
                assert_eq!(serialize(&entries), data);
            }
        });
    }
}
