pub mod inference_worker;
