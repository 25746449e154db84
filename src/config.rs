// Jiagu format constants. The key and IV are baked into the packer's native
// library and identical across every protected APK, so they are properties of
// the format rather than secrets.

pub const AES_KEY: [u8; 16] = *b"bajk3b4j3bvuoa3h";
pub const AES_IV: [u8; 16] = *b"mers46ha35ga23hn";
pub const AES_ENCRYPTED_LENGTH: usize = 512;
pub const XOR_KEY: u8 = 0x66;
pub const XOR_LENGTH: usize = 112;
pub const DEX_MAGIC: [u8; 4] = *b"dex\n";
pub const PAYLOAD_ENTRY: &str = "classes.dex";

/// Everything the pipeline needs to know about one packer variant. The
/// default carries the reference Jiagu values.
#[derive(Debug, Clone)]
pub struct UnpackConfig {
    /// Name of the decoy entry inside the APK.
    pub entry_name: String,
    pub aes_key: [u8; 16],
    pub aes_iv: [u8; 16],
    /// Length of the AES-encrypted prefix of the hidden region, excluding
    /// the padding block.
    pub encrypted_len: usize,
    pub xor_key: u8,
    /// How many leading bytes of each secondary DEX are XOR-masked.
    pub xor_len: usize,
    pub dex_magic: [u8; 4],
    /// Clear the central directory encryption flags before the first read
    /// instead of waiting for the archive reader to reject the entry.
    pub force_clean: bool,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self {
            entry_name: PAYLOAD_ENTRY.to_string(),
            aes_key: AES_KEY,
            aes_iv: AES_IV,
            encrypted_len: AES_ENCRYPTED_LENGTH,
            xor_key: XOR_KEY,
            xor_len: XOR_LENGTH,
            dex_magic: DEX_MAGIC,
            force_clean: false,
        }
    }
}
