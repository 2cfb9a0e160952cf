fn main() {
    causalviz::run();
}
