mod bash;
