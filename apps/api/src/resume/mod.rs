// Resume intake: turning an uploaded document into plain text.

pub mod extract;

/// Two-page resume: page one names the candidate, page two lists Kubernetes and Kafka.
#[cfg(test)]
pub(crate) const SAMPLE_RESUME_PDF: &[u8] = include_bytes!("fixtures/two_page_resume.pdf");
