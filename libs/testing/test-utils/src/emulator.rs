//! Firestore emulator test infrastructure
//!
//! Provides a `TestFirestore` helper that runs the Cloud SDK emulator image.

use database::firestore::{FirestoreClient, FirestoreConfig, GoogleCredentials, connect_with_retry};
use database::reqwest;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const IMAGE: &str = "gcr.io/google.com/cloudsdktool/google-cloud-cli";
const TAG: &str = "emulators";
const PORT: u16 = 8080;

/// Firestore emulator wrapper that ensures proper cleanup
///
/// The container is stopped and removed when this struct is dropped.
/// Each instance uses its own project id so data never leaks between tests.
pub struct TestFirestore {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    pub client: FirestoreClient,
    pub emulator_host: String,
    pub project_id: String,
}

impl TestFirestore {
    /// Start an emulator and connect a client to it
    ///
    /// ```no_run
    /// use test_utils::TestFirestore;
    ///
    /// # async fn example() {
    /// let firestore = TestFirestore::new("my-test").await;
    /// // Pass firestore.client to the repository under test
    /// # }
    /// ```
    pub async fn new(project_id: &str) -> Self {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(PORT.tcp())
            .with_wait_for(WaitFor::message_on_either_std("Dev App Server is now running"))
            .with_cmd([
                "gcloud",
                "emulators",
                "firestore",
                "start",
                "--host-port=0.0.0.0:8080",
            ])
            .start()
            .await
            .expect("Failed to start Firestore emulator container");

        let host_port = container
            .get_host_port_ipv4(PORT)
            .await
            .expect("Failed to get emulator port");
        let emulator_host = format!("127.0.0.1:{}", host_port);

        let config = FirestoreConfig::new(project_id).with_emulator_host(emulator_host.clone());
        let credentials = GoogleCredentials::emulator(project_id);
        let client = connect_with_retry(&config, &credentials, reqwest::Client::new(), None)
            .await
            .expect("Firestore emulator did not become reachable");

        tracing::info!(port = host_port, project_id, "Firestore emulator ready");

        Self {
            container,
            client,
            emulator_host,
            project_id: project_id.to_string(),
        }
    }
}
