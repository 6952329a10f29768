use bitflags::bitflags;

bitflags! {
    /// Boolean option keys reported in `authenticatorGetInfo`'s `options`
    /// map that this engine inspects when deciding whether a device is
    /// eligible for a given ceremony, and what kind of user verification
    /// it is capable of.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Options: u8 {
        /// `rk` — the authenticator supports resident (discoverable) credentials.
        const RESIDENT_KEY = 0b0000_0001;
        /// `uv` — the authenticator has a built-in user verification method (biometrics).
        const USER_VERIFICATION = 0b0000_0010;
        /// `clientPin` — a PIN has been set on the authenticator.
        const CLIENT_PIN = 0b0000_0100;
        /// `bioEnroll` — the authenticator is a biometric authenticator with at least one enrollment.
        const BIO_ENROLL = 0b0000_1000;
        /// `plat` — the authenticator is attached to, and cannot be removed from, the platform.
        const PLATFORM = 0b0001_0000;
        /// `alwaysUv` — the authenticator always enforces user verification.
        const ALWAYS_UV = 0b0010_0000;
    }
}

/// Subset of `authenticatorGetInfo`'s response this engine consumes. A real
/// transport reports many more fields (extensions, transports, pin
/// protocols, ...); the orchestration engine only ever looks at the
/// capability bits folded into `options`.
#[derive(Debug, Clone)]
pub struct Info {
    pub versions: Vec<String>,
    pub aaguid: [u8; 16],
    pub options: Options,
}

impl Info {
    pub fn supports_resident_key(&self) -> bool {
        self.options.contains(Options::RESIDENT_KEY)
    }

    /// A `bioEnroll` device is biometric: its built-in UV touch satisfies
    /// presence and verification in a single physical interaction.
    pub fn is_biometric(&self) -> bool {
        self.options.contains(Options::BIO_ENROLL)
    }

    /// A `clientPin` device that is not biometric requires a PIN to
    /// perform UV.
    pub fn is_pin_protected(&self) -> bool {
        self.options.contains(Options::CLIENT_PIN) && !self.is_biometric()
    }

    /// Plain MFA device: neither a built-in UV method nor a PIN configured.
    pub fn is_plain(&self) -> bool {
        !self
            .options
            .intersects(Options::USER_VERIFICATION | Options::CLIENT_PIN)
    }

    pub fn supports_user_verification(&self) -> bool {
        self.is_biometric() || self.options.contains(Options::CLIENT_PIN)
    }
}
