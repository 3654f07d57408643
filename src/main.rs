#[cfg(target_os = "espidf")]
mod firmware;
#[cfg(not(target_os = "espidf"))]
mod simulator;

fn main() -> anyhow::Result<()> {
    #[cfg(target_os = "espidf")]
    {
        firmware::start()
    }

    #[cfg(not(target_os = "espidf"))]
    {
        simulator::start()
    }
}
