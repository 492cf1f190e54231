//! Resource types exposed by the provider, plus helpers shared between them.

pub mod secondary_zone;

use dnsimple_client::ValidationFailure;
use tf_resource::{AttrPath, Diagnostics, ResourceFactory};

pub use secondary_zone::{DomainSecondaryZoneResource, SecondaryZoneModel};

/// Every resource type the provider registers.
pub fn all() -> Vec<ResourceFactory> {
    vec![DomainSecondaryZoneResource::factory as ResourceFactory]
}

/// One diagnostic per rejected attribute, addressed to that attribute.
pub(crate) fn validation_failures_to_diagnostics(failures: &[ValidationFailure]) -> Diagnostics {
    let mut diags = Diagnostics::new();
    for f in failures {
        diags.add_attribute_error(
            AttrPath::root(&f.field),
            format!("API returned a Validation Error for: {}", f.field),
            f.messages.join(", "),
        );
    }
    diags
}
