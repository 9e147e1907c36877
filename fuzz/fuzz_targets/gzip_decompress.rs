use compression_analyzer::{GzipArchiver, GzipCodec, MultiFileArchiver, SingleBufferCodec};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let _ = GzipCodec.decompress(data);
            let _ = GzipArchiver::default().unpack(data);
        });
    }
}
