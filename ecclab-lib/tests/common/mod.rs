use std::{fs::File, io::BufReader, path::PathBuf};

use ecclab::BitSequence;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

pub fn read_fixture(name: &str) -> BitSequence {
    let file = File::open(fixture_path(name)).unwrap();
    ecclab::bits::read_frame(BufReader::new(file)).unwrap()
}
