fn main() {
    combotest::cli::run();
}
