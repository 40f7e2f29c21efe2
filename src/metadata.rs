//! Install subject metadata.
//!
//! `AppInstallMetadata` is the immutable record that formulas are matched
//! against. It is built once per install evaluation through
//! [`AppInstallMetadataBuilder`] and is read-only afterwards.

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::formula::Key;

/// Metadata describing the package being installed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppInstallMetadata {
    package_name: String,
    app_certificate: String,
    installer_name: String,
    installer_certificate: String,
    version_code: i64,
    is_pre_installed: bool,
}

/// Borrowed view of a single subject attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Attribute<'a> {
    Str(&'a str),
    Long(i64),
    Boolean(bool),
}

impl AppInstallMetadata {
    /// Start building a metadata record. Unset fields default to empty/zero/false.
    pub fn builder() -> AppInstallMetadataBuilder {
        AppInstallMetadataBuilder::default()
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn app_certificate(&self) -> &str {
        &self.app_certificate
    }

    pub fn installer_name(&self) -> &str {
        &self.installer_name
    }

    pub fn installer_certificate(&self) -> &str {
        &self.installer_certificate
    }

    pub fn version_code(&self) -> i64 {
        self.version_code
    }

    pub fn is_pre_installed(&self) -> bool {
        self.is_pre_installed
    }

    /// Look up the attribute a formula key refers to.
    pub(crate) fn attribute(&self, key: Key) -> Attribute<'_> {
        match key {
            Key::PackageName => Attribute::Str(&self.package_name),
            Key::AppCertificate => Attribute::Str(&self.app_certificate),
            Key::InstallerName => Attribute::Str(&self.installer_name),
            Key::InstallerCertificate => Attribute::Str(&self.installer_certificate),
            Key::VersionCode => Attribute::Long(self.version_code),
            Key::PreInstalled => Attribute::Boolean(self.is_pre_installed),
        }
    }
}

/// Builder for [`AppInstallMetadata`].
#[derive(Clone, Debug, Default)]
pub struct AppInstallMetadataBuilder {
    inner: AppInstallMetadata,
}

impl AppInstallMetadataBuilder {
    pub fn package_name(mut self, package_name: impl Into<String>) -> Self {
        self.inner.package_name = package_name.into();
        self
    }

    pub fn app_certificate(mut self, app_certificate: impl Into<String>) -> Self {
        self.inner.app_certificate = app_certificate.into();
        self
    }

    pub fn installer_name(mut self, installer_name: impl Into<String>) -> Self {
        self.inner.installer_name = installer_name.into();
        self
    }

    pub fn installer_certificate(mut self, installer_certificate: impl Into<String>) -> Self {
        self.inner.installer_certificate = installer_certificate.into();
        self
    }

    pub fn version_code(mut self, version_code: i64) -> Self {
        self.inner.version_code = version_code;
        self
    }

    pub fn pre_installed(mut self, is_pre_installed: bool) -> Self {
        self.inner.is_pre_installed = is_pre_installed;
        self
    }

    pub fn build(self) -> AppInstallMetadata {
        self.inner
    }
}
