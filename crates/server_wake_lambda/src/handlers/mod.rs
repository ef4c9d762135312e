pub mod scale_up;
