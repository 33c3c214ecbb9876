pub mod job_description;
