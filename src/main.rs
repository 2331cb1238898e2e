fn main() {
    ship_eater::game::run();
}
