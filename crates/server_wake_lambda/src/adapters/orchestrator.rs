use server_wake_core::config::ServiceIdentity;

/// Read and write access to a service's desired task count.
pub trait ServiceOrchestrator {
    fn desired_count(&self, identity: &ServiceIdentity) -> Result<u32, String>;

    fn set_desired_count(&self, identity: &ServiceIdentity, desired_count: u32)
        -> Result<(), String>;
}
