//! Minimal CTAP2 request/response vocabulary for the two operations this
//! engine's Device Adapter (`fido2_engine::device::adapter`) actually
//! issues to an authenticator: `authenticatorMakeCredential` and
//! `authenticatorGetAssertion`, plus the `authenticatorGetInfo` capability
//! record the Device Locator/Adapter probes on first contact with a device.
//!
//! The key-agreement and PIN-management commands
//! (`authenticatorClientPin`, `authenticatorCredentialManagement`,
//! `authenticatorBioEnrollment`, `authenticatorReset`, `authenticatorConfig`,
//! `authenticatorSelection`) belong to the libfido2 transport this engine
//! treats as an external collaborator, and are not modelled here.

pub mod authenticator;

pub use authenticator::Sha256Hash;

/// Raw CTAP2 operations a Device Adapter dispatches over the (abstract)
/// transport. Mirrors the subset of the CTAP2 authenticator API this
/// engine drives directly.
pub trait Ctap2Device {
    /// > This method is invoked by the host to request generation of a new
    /// > credential in the authenticator.
    fn make_credential(
        &mut self,
        request: authenticator::credential::make::Request,
    ) -> Result<authenticator::credential::make::Response, authenticator::credential::make::Error>;

    /// > This method is used by a host to request cryptographic proof of user
    /// > authentication as well as user consent to a given transaction, using a
    /// > previously generated credential that is bound to the authenticator and
    /// > relying party identifier.
    fn get_assertion(
        &mut self,
        request: authenticator::assertion::get::Request,
    ) -> Result<authenticator::assertion::get::Response, authenticator::assertion::get::Error>;

    /// > Using this method, platforms can request that the authenticator report
    /// > a list of its supported protocol versions and extensions, its AAGUID,
    /// > and other aspects of its overall capabilities. Platforms should use
    /// > this information to tailor their command parameters choices.
    fn get_info(&self) -> authenticator::device::Info;
}

#[repr(u8)]
pub enum Command {
    AuthenticatorMakeCredential = 0x01,
    AuthenticatorGetAssertion = 0x02,
    AuthenticatorGetNextAssertion = 0x08,
    AuthenticatorGetInfo = 0x04,
}
