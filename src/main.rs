fn main() {
    palmcontrol_lib::run()
}
