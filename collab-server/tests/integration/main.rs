mod common;
mod workflow_collab_test;
