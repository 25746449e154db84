//! Unpacker for Jiagu-protected Android applications.
//!
//! The packer replaces the app's `classes.dex` with a decoy: a shell DEX up
//! front, the original modules hidden behind it, and a 4-byte big-endian
//! shell length at the very end. The first 528 bytes of the hidden region
//! are AES-128-CBC encrypted with a fixed key and IV; every DEX after the
//! first additionally has its first 112 bytes XOR-masked with `0x66`. On
//! top of that the APK's central directory carries a fake encryption flag
//! so standard ZIP tools demand a password that does not exist.
//!
//! [`unpack`] runs the whole chain in memory and returns the shell DEX, the
//! original application name and every recovered module.

#[macro_use]
extern crate log;

pub mod config;
pub mod crypto;
pub mod dex;
pub mod error;
pub mod extract;
pub mod payload;
pub mod zip_clean;

pub use config::UnpackConfig;
pub use dex::DexModule;
pub use error::{Result, UnpackError};

/// Everything recovered from one packed APK.
#[derive(Debug)]
pub struct UnpackedApp {
    /// Original `android:name` of the application class.
    pub app_name: String,
    /// The decoy shell DEX, written out verbatim for analysis.
    pub shell_dex: Vec<u8>,
    /// Recovered modules in payload order. Index 0 becomes `classes.dex`,
    /// index i becomes `classes{i+1}.dex`.
    pub dex_files: Vec<DexModule>,
}

/// Runs the full unpack pipeline over raw APK bytes. Pure in-memory: the
/// caller decides what to write, and nothing is emitted on failure.
pub fn unpack(apk: &[u8], config: &UnpackConfig) -> Result<UnpackedApp> {
    let packed = extract::read_entry_cleaning(apk, &config.entry_name, config.force_clean)?;
    info!("extracted {}, {} bytes", config.entry_name, packed.len());

    let (shell, region) = payload::parse_shell(&packed)?;
    info!(
        "shell dex {} bytes, hidden region {} bytes",
        shell.len(),
        region.len()
    );

    let cipher = crypto::BlockCipher::new(config.aes_key, config.aes_iv, config.encrypted_len);
    let window = cipher.window_len();
    if region.len() < window {
        return Err(UnpackError::InsufficientData {
            needed: window,
            have: region.len(),
        });
    }

    let mut decrypted = cipher.decrypt_fixed(&region[..window])?;
    decrypted.extend_from_slice(&region[window..]);
    debug!("header window decrypted, {} bytes total", decrypted.len());

    let (app_name, segments) = payload::parse_segments(&decrypted)?;
    info!("original application: {}", app_name);

    let mask = crypto::XorMask::new(config.xor_key, config.xor_len);
    let mut dex_files = Vec::with_capacity(segments.len());
    for (i, mut segment) in segments.into_iter().enumerate() {
        if i > 0 {
            mask.apply(&mut segment);
            debug!("unmasked dex #{}", i + 1);
        }
        let module = DexModule::new(segment, &config.dex_magic);
        if module.valid {
            info!("dex #{}: {} bytes", i + 1, module.data.len());
        } else {
            warn!(
                "dex #{}: {} bytes, unexpected magic {}",
                i + 1,
                module.data.len(),
                hex::encode(module.magic)
            );
        }
        dex_files.push(module);
    }

    Ok(UnpackedApp {
        app_name,
        shell_dex: shell.to_vec(),
        dex_files,
    })
}
