// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Build script for the i.MX power management layer.

use std::env;

/// The SoC families which can be selected with `--cfg platform="..."`.
const PLATFORMS: [&str; 2] = ["imx95", "imx8m"];

fn main() {
    println!(
        "cargo::rustc-check-cfg=cfg(platform, values(\"{}\"))",
        PLATFORMS.join("\", \""),
    );
    println!("cargo:rerun-if-env-changed=LOG_LEVEL");

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        let platform = env::var("CARGO_CFG_PLATFORM").expect("Missing platform name");
        assert!(
            PLATFORMS.contains(&platform.as_str()),
            "Unsupported platform {platform}"
        );
    }
}
