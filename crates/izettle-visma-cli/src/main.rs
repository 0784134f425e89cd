fn main() -> anyhow::Result<()> {
    izettle_visma_cli::run(std::env::args())
}
