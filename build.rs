fn main() {
    // For integration tests, compile the test UI
    slint_build::compile("tests/ui/test.slint").unwrap();
}
