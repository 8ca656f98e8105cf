//! Check command implementation.
//!
//! Validates system requirements and configuration.

use memtop::process::{collect_proc_entries, parse_memory_for_process};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::{validate_requirements, ValidationError};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 memtop - System Check");
    println!("========================");

    let mut all_ok = true;
    let root = config.proc_root();

    println!("\n📁 Checking {}...", root.display());
    match collect_proc_entries(&root, Some(5)) {
        Ok(entries) if entries.is_empty() => {
            println!("   ❌ No process entries found in {}", root.display());
            all_ok = false;
        }
        Ok(entries) => println!("   ✅ Can read {} process entries", entries.len()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    match validate_requirements(&root) {
        Ok(()) => println!("   ✅ smaps of other users' processes readable"),
        Err(ValidationError::InsufficientPermissions(e)) => {
            // Still usable, just limited to own processes
            println!("   ⚠️  Only own processes visible: {}", e);
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n💾 Checking memory metrics accessibility...");
    let own_path = root.join(std::process::id().to_string());
    match parse_memory_for_process(&own_path, config.scan_options().scrape.prefer_rollup) {
        Ok(mem) => println!(
            "   ✅ Memory parsing successful: RSS={}kB, PSS={}kB, USS={}kB, Swap={}kB",
            mem.rss, mem.pss, mem.uss, mem.swap
        ),
        Err(e) => {
            println!("   ❌ Memory parsing failed: {}", e);
            all_ok = false;
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        std::process::exit(1);
    }
}
