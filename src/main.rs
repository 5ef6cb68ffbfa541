use clap::Parser;
use dispatch_pool::utils::{logger, validation::Validate};
use dispatch_pool::{
    register_builtins, CallMode, CapabilityRegistry, CliConfig, DispatchConfig, OutputFormat,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(env!("CARGO_PKG_NAME"), config.verbose, config.log_format());

    tracing::info!("Starting dispatch-pool CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 載入 TOML 配置
    let dispatch_config = match &config.config {
        Some(path) => match DispatchConfig::from_file(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => DispatchConfig::default(),
    };

    if let Err(e) = dispatch_config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let fields = match config.request_fields() {
        Ok(fields) => fields,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let mut registry = CapabilityRegistry::new();
    register_builtins(&mut registry);

    let mut dispatcher = dispatch_config.build_dispatcher(registry);
    if config.insecure {
        tracing::warn!("⚠️ Insecure mode: safe-zone checks disabled");
        dispatcher = dispatcher.with_mode(CallMode::Insecure);
    }

    let output = dispatcher.run(fields);

    match output.format {
        OutputFormat::Structured => println!("{}", serde_json::to_string_pretty(&output.pool)?),
        OutputFormat::Raw => println!("{:#?}", output.pool),
    }

    Ok(())
}
