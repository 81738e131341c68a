//! Move-cell references: where a player deposits their move out-of-band.

use rand::RngCore;
use rps_core::CellScheme;
use sha2::{Digest, Sha256};

const PREFIX: &str = "rps";
const SUFFIX: &str = "cell";

pub fn derive_cell_ref(scheme: CellScheme, player: &str) -> String {
    match scheme {
        CellScheme::Deterministic => format!("{}{}{}", PREFIX, player, SUFFIX),
        CellScheme::Hashed => {
            let mut nonce = [0u8; 16];
            rand::thread_rng().fill_bytes(&mut nonce);

            let mut hasher = Sha256::new();
            hasher.update(player.as_bytes());
            hasher.update(nonce);
            let digest = hex::encode(hasher.finalize());

            format!("{}{}{}", PREFIX, &digest[..32], SUFFIX)
        }
    }
}
