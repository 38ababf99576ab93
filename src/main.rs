fn main() {
    env_logger::init();
    harrier::board::init();
    harrier::uci::run();
}
