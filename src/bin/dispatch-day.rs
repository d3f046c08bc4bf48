fn main() -> Result<(), Box<dyn std::error::Error>> {
    parcel_dispatch::app::run()
}
