fn main() {
    // Propagates ESP-IDF sysenv (link args, kconfig) when building for
    // espidf targets; emits nothing on plain host builds.
    embuild::espidf::sysenv::output();
}
