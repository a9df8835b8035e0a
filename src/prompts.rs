//! Fixed instruction templates sent alongside the uploaded image.

pub const EXPLAIN: &str = "You are a clear, friendly Korean tutor. \
Extract the text from the image and write a short explanation (3\u{2013}6 sentences) in Korean.";

pub const FLASHCARDS: &str = "You are an assistant that creates Anki flashcards from study notes.\n\
Extract the key concepts from the image and create a list of Q&A pairs.\n\
Return the output in this specific JSON structure:\n\
[\n\
  {\"question\": \"Concept or Question in Korean\", \"answer\": \"Definition or Answer in Korean/English\"}\n\
]";
